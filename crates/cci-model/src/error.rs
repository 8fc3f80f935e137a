use crate::facet::FacetKind;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown facet name: {name}")]
    UnknownFacet { name: String },

    #[error("missing DRS component for facet {facet}")]
    MissingDrsComponent { facet: FacetKind },
}
