//! REST resource paths
//!
//! Every server-relative URL or name is passed as an OData parameter alias
//! (`@u`, `@n`, `@id`) in the query string, never spliced into the path.

use uuid::Uuid;

pub const CONTEXT_INFO: &str = "contextinfo";

pub const FILE: &str = "web/GetFileByServerRelativeUrl(@u)";
pub const FILE_CONTENT: &str = "web/GetFileByServerRelativeUrl(@u)/$value";
pub const MOVE_FILE: &str = "web/GetFileByServerRelativeUrl(@u)/moveto(newurl=@n,flags=1)";
pub const COPY_FILE: &str =
    "web/GetFileByServerRelativeUrl(@u)/copyto(strnewurl=@n,boverwrite=true)";

pub const FOLDER: &str = "web/GetFolderByServerRelativeUrl(@u)";
pub const FOLDER_FILES: &str = "web/GetFolderByServerRelativeUrl(@u)/Files";
pub const FOLDER_FOLDERS: &str = "web/GetFolderByServerRelativeUrl(@u)/Folders";
pub const ADD_FILE: &str =
    "web/GetFolderByServerRelativeUrl(@u)/Files/add(url=@n,overwrite=true)";
pub const MOVE_FOLDER: &str = "web/GetFolderByServerRelativeUrl(@u)/moveto(newurl=@n)";
pub const ADD_FOLDER: &str = "web/Folders/add(@u)";

pub const START_UPLOAD: &str = "web/GetFileByServerRelativeUrl(@u)/StartUpload(uploadId=@id)";
pub const CANCEL_UPLOAD: &str = "web/GetFileByServerRelativeUrl(@u)/CancelUpload(uploadId=@id)";

pub fn continue_upload(offset: u64) -> String {
    format!(
        "web/GetFileByServerRelativeUrl(@u)/ContinueUpload(uploadId=@id,fileOffset={})",
        offset
    )
}

pub fn finish_upload(offset: u64) -> String {
    format!(
        "web/GetFileByServerRelativeUrl(@u)/FinishUpload(uploadId=@id,fileOffset={})",
        offset
    )
}

/// OData string literal: single quotes are doubled inside the quotes.
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// OData guid literal
pub fn guid(id: &Uuid) -> String {
    format!("guid'{}'", id)
}
