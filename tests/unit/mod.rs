/// Unit tests for the public calculators and local stores
mod level_curve;
mod day_rules;
mod local_flags;
