mod admission_steps;
mod combat_steps;
mod match_steps;
mod replication_steps;
