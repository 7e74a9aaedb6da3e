//! Weft Core Types
//!
//! This crate provides the foundational types shared by the Weft diagram
//! language crates. It includes:
//!
//! - **Identifiers**: String-interned element identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Props**: The typed property schema with deep merge ([`props`] module)
//! - **Document**: The live element graph ([`document::Document`])
//! - **Transactions**: [`unit_of_work::UnitOfWork`] and the undo [`history::History`]

pub mod decoration;
pub mod document;
pub mod geometry;
pub mod history;
pub mod identifier;
pub mod props;
pub mod unit_of_work;
