mod common;
mod questions;
