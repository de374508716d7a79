pub mod form_mapper;

pub use form_mapper::FormMapper;
