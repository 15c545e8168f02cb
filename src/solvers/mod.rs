pub mod advect1d;
