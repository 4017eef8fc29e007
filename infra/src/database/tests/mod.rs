mod connection_tests;
mod mysql_store_tests;
