mod common;
mod workflow;
