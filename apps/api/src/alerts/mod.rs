// Alert analysis API: renders the analysis template with the alert and
// post-processes the model reply through `analysis`.
// All model calls go through llm_client.

pub mod handlers;
