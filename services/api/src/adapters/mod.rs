pub mod codegen_llm;
pub mod db;
