//! Варианты interactable объектов

mod charge_station;
mod medical;
mod pickup;
mod portal;
mod sub_computer;


pub use charge_station::{tick_charge_stations, ChargeDisplay, ChargeStation, ChargeStationConfig};
pub use medical::MedicalStation;
pub use pickup::ItemPickup;
pub use portal::Portal;
pub use sub_computer::SubComputer;
