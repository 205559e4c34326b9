pub mod engine;
pub mod simulation;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod tests;
