pub mod architecture;
pub mod erd;
