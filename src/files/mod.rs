//! File naming for logs written by actmine.

pub mod filename;
