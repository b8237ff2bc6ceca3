pub mod ecr;
