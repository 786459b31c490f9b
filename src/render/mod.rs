pub(crate) mod composite;
pub(crate) mod coverage;
pub(crate) mod raster_surface;
pub(crate) mod surface;
