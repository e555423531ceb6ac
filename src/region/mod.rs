pub(crate) mod builder;
pub(crate) mod raster;
pub(crate) mod rect;
