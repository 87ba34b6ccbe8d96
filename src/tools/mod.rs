pub mod ear_trainer;
pub mod sound_bank;
