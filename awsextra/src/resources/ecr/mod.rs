pub mod mapper;
pub mod repository;

#[cfg(test)]
mod repository_test;
