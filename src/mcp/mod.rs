// Model Context Protocol surface: JSON-RPC types, tool catalog, request dispatch
pub mod handler;
pub mod protocol;
pub mod tools;
