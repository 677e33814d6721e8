//! Prerequisite and degree-requirement reasoning engine.
//!
//! Leaves first: [`code`] and [`catalog`] hold course metadata, [`prereq`]
//! parses and solves prerequisite expressions, [`transcript`] derives the
//! completed-course set, [`degree`] reconciles requirement sections,
//! [`plan`] validates candidate plans, and [`recommend`] drives the
//! bounded-retry loop around an injected candidate generator.

pub mod catalog;
pub mod code;
pub mod degree;
pub mod plan;
pub mod prereq;
pub mod recommend;
pub mod transcript;
