pub mod catalog;
pub mod extract;
pub mod resolve;

pub use catalog::{list_workflow_catalog, WorkflowListing};
pub use extract::{
    fetch_input_schema, locate_dispatch_section, parse_input_schema, trigger_section,
    DispatchSection, InputType, SchemaError, WorkflowInputSpec, WorkflowSchema,
};
pub use resolve::{
    extension_candidates, path_matches, resolve_workflow, strip_workflow_extension,
    workflow_definition_path, WORKFLOWS_DIR, WORKFLOW_EXTENSIONS,
};
