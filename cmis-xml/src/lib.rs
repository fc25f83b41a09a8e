// utils
pub mod error;
pub mod xml;
pub mod value;
pub mod enums;

// properties and their definitions
pub mod proptypes;
pub mod propencoder;
pub mod propdecoder;

// objects, repository, types
pub mod coretypes;
pub mod coreencoder;
pub mod coredecoder;

// service envelopes
pub mod msgtypes;
pub mod msgencoder;
pub mod msgdecoder;

// final type
pub mod message;
pub mod codec;
