mod estimate;
mod exercise;
mod helpers;
mod import;
mod meal;
mod profile;
mod summary;
mod weight;

pub(crate) use estimate::{BodyArgs, cmd_estimate_bmr, cmd_estimate_exercise, cmd_estimate_tdee};
pub(crate) use exercise::cmd_exercise_add;
pub(crate) use import::{ImportKind, cmd_import};
pub(crate) use meal::{cmd_delete, cmd_meal_add};
pub(crate) use profile::{ProfileUpdate, cmd_profile_set, cmd_profile_show};
pub(crate) use summary::{cmd_history, cmd_month, cmd_summary};
pub(crate) use weight::{cmd_weight_history, cmd_weight_log};
