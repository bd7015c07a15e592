//! The two exemplar simulators exercising the `Simulator` contract (spec §1,
//! "two exemplar simulators — an assembly and an insect-hotel variant").

pub mod assembly;
pub mod hotel;
