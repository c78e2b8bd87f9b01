#![warn(clippy::all)]
pub(crate) mod account;
pub(crate) mod action;
pub(crate) mod catalog;
pub(crate) mod condition;
pub(crate) mod effect;
pub(crate) mod error;
pub(crate) mod eval;
pub(crate) mod evaluator;
pub(crate) mod identity;
pub(crate) mod policy;
pub(crate) mod principal;
pub(crate) mod statement;
pub(crate) mod summary;

#[macro_use]
pub(crate) mod serutil;

pub use {
    catalog::{AccessLevel, PermissionCatalog, Permissions},
    condition::{Condition, ConditionMap, ConditionOp, OpCategory},
    effect::Effect,
    error::ExposureError,
    eval::evaluate_policy,
    evaluator::{Evaluator, EvaluatorBuilder, EvaluatorBuilderError},
    policy::{Policy, PolicyBuilder, PolicyBuilderError},
    principal::{Principal, PrincipalBuilder, PrincipalBuilderError},
    serutil::StringList,
    statement::{Statement, StatementBuilder, StatementBuilderError},
    summary::{Exposure, PolicySummary},
};
