pub mod car_listing;
pub mod delay;
pub mod prediction;
