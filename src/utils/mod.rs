pub mod outcome_cache;
