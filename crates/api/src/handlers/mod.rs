pub mod assets;
pub mod capture;
pub mod email;
pub mod frames;
pub mod photos;
pub mod qr;
pub mod settings;
