//! Whole-world scenario tests

mod scenarios;
