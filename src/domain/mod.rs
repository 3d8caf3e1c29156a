pub mod contract;
pub mod definition;
pub mod entity;
pub mod extraction;
pub mod grammar;
pub mod ports;
pub mod reader;
pub mod scanner;
