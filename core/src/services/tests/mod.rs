mod mocks;

mod compromise_tests;
