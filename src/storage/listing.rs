//! Folder listing
//!
//! Files of a folder come first in the order the service returns them,
//! followed by its subfolders. With recursion each subfolder entry is
//! immediately followed by its own contents. Paged collections are
//! followed through their `odata.nextLink` until exhausted.

use log::debug;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

use crate::error::StorageError;
use crate::filesystem::FileEntry;
use crate::remote::endpoints::{self, literal};
use crate::remote::models::Collection;
use crate::remote::{FileProps, FolderProps, Params};
use crate::storage::adapter::SharepointAdapter;

/// System folder every document library carries at its root
const FORMS_FOLDER: &str = "Forms";

/// Upper bound on pages fetched for one collection
const MAX_LIST_PAGES: usize = 1000;

type ListFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<FileEntry>, StorageError>> + Send + 'a>>;

impl SharepointAdapter {
    /// List the folder at a server-relative URL. A folder that does not
    /// exist lists as empty.
    pub(crate) fn list_folder(&self, url: String, recursive: bool) -> ListFuture<'_> {
        Box::pin(async move {
            let params = [("@u", literal(&url))];

            let files = match self
                .collect_pages::<FileProps>(endpoints::FOLDER_FILES, &params, &url)
                .await
            {
                Ok(files) => files,
                Err(e) if e.is_not_found() => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };

            let folders = match self
                .collect_pages::<FolderProps>(endpoints::FOLDER_FOLDERS, &params, &url)
                .await
            {
                Ok(folders) => folders,
                Err(e) if e.is_not_found() => Vec::new(),
                Err(e) => return Err(e),
            };

            let at_library_root = url
                .trim_end_matches('/')
                .eq_ignore_ascii_case(self.paths.library_url().trim_end_matches('/'));

            let mut entries = Vec::with_capacity(files.len() + folders.len());

            for file in files.iter().filter(|f| f.exists()) {
                let path = self.paths.to_logical(&file.server_relative_url)?;
                entries.push(self.file_entry(path, file));
            }

            for folder in folders.iter().filter(|f| f.exists()) {
                if at_library_root && folder.name.eq_ignore_ascii_case(FORMS_FOLDER) {
                    continue;
                }

                let path = self.paths.to_logical(&folder.server_relative_url)?;
                entries.push(self.folder_entry(path, folder));

                if recursive {
                    let nested = self
                        .list_folder(folder.server_relative_url.clone(), true)
                        .await?;
                    entries.extend(nested);
                }
            }

            Ok(entries)
        })
    }

    /// Fetch a collection and every page the service links after it.
    async fn collect_pages<T>(
        &self,
        resource: &str,
        params: &Params<'_>,
        url: &str,
    ) -> Result<Vec<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        let mut page: Collection<T> = self.client.get_json(resource, params, url).await?;
        let mut items = std::mem::take(&mut page.value);

        for _ in 1..MAX_LIST_PAGES {
            let Some(link) = page.next_link.take() else {
                return Ok(items);
            };
            debug!("Following next page of {}", url);
            page = self.client.get_json_link(&link, url).await?;
            items.append(&mut page.value);
        }

        if page.next_link.is_some() {
            return Err(StorageError::Unsupported(format!(
                "listing of {} spans more than {} pages",
                url, MAX_LIST_PAGES
            )));
        }
        Ok(items)
    }
}
