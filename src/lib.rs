//! Double-description convex polyhedra over rational coordinates.
//!
//! This crate computes with convex polyhedra represented by both a
//! constraint system (`Ax ⋈ b`, `⋈ ∈ {=, ≥, >}`) and a generator system
//! (points, closure points, rays and lines) kept in lock-step via the
//! Chernikova-style conversion algorithm. [`poly::Poly`]
//! is the core engine; [`bbox::BPoly`], [`fpoly::FPoly`] and
//! [`upoly::UPoly`] wrap it with, respectively, a bounding-box cache, a
//! Cartesian factorization over independent blocks of dimensions, and an
//! unconstrained-dimension projection. [`dispatch`] ties all four
//! together behind one object-safe trait, [`dispatch::AbsPoly`], so
//! callers that don't care which representation backs a value can still
//! build and combine them by name.
//!
//! Coordinates are exact rationals (via `num-bigint`/`num-rational`,
//! wrapped as [`num::Z`]/[`num::Q`]); there is no floating point anywhere
//! in the public API.

pub mod ascii;
pub mod bbox;
pub mod bits;
pub mod config;
pub mod dispatch;
pub mod fpoly;
pub mod linexpr;
pub mod num;
pub mod poly;
pub mod row;
pub mod satmatrix;
pub mod upoly;

pub use bbox::BPoly;
pub use dispatch::AbsPoly;
pub use fpoly::FPoly;
pub use poly::Poly;
pub use row::{Con, Gen, Topology};
pub use upoly::UPoly;
