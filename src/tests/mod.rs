mod property_tests;
mod solver_tests;
