pub mod tool_filter;
