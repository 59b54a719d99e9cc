mod entity_type_tests;
mod system_tests;
