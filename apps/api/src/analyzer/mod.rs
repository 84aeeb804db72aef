// Resume analyzer: scores an uploaded or pasted resume against a job
// description through llm_client, validates the reply, and keeps a per-user
// history. All LLM calls go through llm_client.

pub mod analysis;
pub mod extract;
pub mod handlers;
pub mod improve;
#[cfg(test)]
pub mod memory;
pub mod prompts;
pub mod store;
