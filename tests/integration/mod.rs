/// Integration tests driving the server end to end
mod server_workflow;
mod mcp_protocol;
