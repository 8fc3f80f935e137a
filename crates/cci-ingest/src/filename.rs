//! ESACCI filename parsing.
//!
//! File names come in two mutually exclusive formats, `-` delimited:
//!
//! ```text
//! Format 1
//!     <IndicativeDate>[<IndicativeTime>]-ESACCI
//!     -<ProcessingLevel>_<CCIProject>-<DataType>-<ProductString>
//!     [-<AdditionalSegregator>][-v<GDSVersion>]-fv<FileVersion>.nc
//! Format 2
//!     ESACCI-<CCIProject>-<ProcessingLevel>-<DataType>-
//!     <ProductString>[-<AdditionalSegregator>]-
//!     <IndicativeDate>[<IndicativeTime>]-fv<FileVersion>.nc
//! ```
//!
//! Format 1 is recognized by `ESACCI` in the second token, Format 2 by
//! `ESACCI` in the first. Extraction is purely lexical; no vocabulary
//! lookups happen here.

use cci_model::{FacetKind, RawFacetSet};

use crate::error::ParseError;

/// Marker token that identifies an ESACCI filename.
const ESACCI: &str = "ESACCI";

/// Parse an ESACCI filename (a bare name or a full path) into its raw facet
/// tokens.
pub fn parse_filename(path: &str) -> Result<RawFacetSet, ParseError> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let Some(stem) = name.strip_suffix(".nc") else {
        return Err(ParseError::MissingExtension {
            name: name.to_string(),
        });
    };

    let tokens: Vec<&str> = stem.split('-').collect();
    if tokens.len() < 5 {
        return Err(ParseError::TooFewTokens {
            name: name.to_string(),
        });
    }

    if tokens[1] == ESACCI {
        parse_format_1(name, &tokens)
    } else if tokens[0] == ESACCI {
        parse_format_2(name, &tokens)
    } else {
        Err(ParseError::MissingMarker {
            name: name.to_string(),
        })
    }
}

fn parse_format_1(name: &str, tokens: &[&str]) -> Result<RawFacetSet, ParseError> {
    let file_version = file_version_token(name, tokens)?;
    let date = indicative_date_token(name, tokens[0])?;

    // <ProcessingLevel>_<CCIProject> share a token; some producers drop the
    // underscore and use two tokens instead.
    let (processing_level, cci_project, mut next) = match tokens[2].split_once('_') {
        Some((level, project)) => (level, project, 3),
        None => (tokens[2], tokens[3], 4),
    };

    let last = tokens.len() - 1;
    if next + 1 >= last {
        return Err(ParseError::TooFewTokens {
            name: name.to_string(),
        });
    }
    let data_type = tokens[next];
    let product_string = tokens[next + 1];
    next += 2;

    let mut facets = RawFacetSet::new();
    facets.insert(FacetKind::IndicativeDate, date);
    facets.insert(FacetKind::ProcessingLevel, processing_level);
    facets.insert(FacetKind::CciProject, cci_project);
    facets.insert(FacetKind::DataType, data_type);
    facets.insert(FacetKind::ProductString, product_string);
    facets.insert(FacetKind::FileVersion, file_version);

    // Up to two optional tokens sit between the product string and the fv
    // token. `v<digits>` is the GDS version; anything else is the
    // segregator. Two tokens that both fail the GDS test cannot be placed.
    match &tokens[next..last] {
        [] => {}
        [single] => {
            if is_gds_version(single) {
                facets.insert(FacetKind::GdsVersion, *single);
            } else {
                facets.insert(FacetKind::Segregator, *single);
            }
        }
        [segregator, gds] => {
            if !is_gds_version(gds) {
                return Err(ParseError::UnexpectedToken {
                    name: name.to_string(),
                    token: (*gds).to_string(),
                });
            }
            facets.insert(FacetKind::Segregator, *segregator);
            facets.insert(FacetKind::GdsVersion, *gds);
        }
        [_, _, extra, ..] => {
            return Err(ParseError::UnexpectedToken {
                name: name.to_string(),
                token: (*extra).to_string(),
            });
        }
    }
    Ok(facets)
}

fn parse_format_2(name: &str, tokens: &[&str]) -> Result<RawFacetSet, ParseError> {
    let file_version = file_version_token(name, tokens)?;
    let last = tokens.len() - 1;
    if last < 6 {
        return Err(ParseError::TooFewTokens {
            name: name.to_string(),
        });
    }

    let mut facets = RawFacetSet::new();
    facets.insert(FacetKind::CciProject, tokens[1]);
    facets.insert(FacetKind::ProcessingLevel, tokens[2]);
    facets.insert(FacetKind::DataType, tokens[3]);
    facets.insert(FacetKind::ProductString, tokens[4]);
    facets.insert(FacetKind::FileVersion, file_version);

    // The indicative date is the token immediately before fv, with at most
    // one segregator token before it.
    match &tokens[5..last] {
        [date] => {
            facets.insert(FacetKind::IndicativeDate, indicative_date_token(name, date)?);
        }
        [segregator, date] => {
            facets.insert(FacetKind::Segregator, *segregator);
            facets.insert(FacetKind::IndicativeDate, indicative_date_token(name, date)?);
        }
        [] => {
            return Err(ParseError::TooFewTokens {
                name: name.to_string(),
            });
        }
        [_, _, extra, ..] => {
            return Err(ParseError::UnexpectedToken {
                name: name.to_string(),
                token: (*extra).to_string(),
            });
        }
    }
    Ok(facets)
}

/// The final token must be `fv<FileVersion>`.
fn file_version_token(name: &str, tokens: &[&str]) -> Result<String, ParseError> {
    tokens
        .last()
        .and_then(|token| token.strip_prefix("fv"))
        .filter(|version| !version.is_empty())
        .map(String::from)
        .ok_or_else(|| ParseError::MissingFileVersion {
            name: name.to_string(),
        })
}

/// An indicative date is at least YYYYMMDD, optionally extended with a time,
/// all digits.
fn indicative_date_token(name: &str, token: &str) -> Result<String, ParseError> {
    if token.len() >= 8 && token.bytes().all(|b| b.is_ascii_digit()) {
        Ok(token.to_string())
    } else {
        Err(ParseError::InvalidIndicativeDate {
            name: name.to_string(),
            token: token.to_string(),
        })
    }
}

/// `v` followed by digits (dots allowed) marks the GDS version token.
fn is_gds_version(token: &str) -> bool {
    token
        .strip_prefix('v')
        .is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_ascii_digit())
                && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
        })
}
