use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{
    CommitRef, ImageVersion, Page, PageSummary, PagedSession, Session, SessionManifest,
};
use crate::models::page::page_file_name;

/// Chunk one session into pages of `page_size` turns (the last page may be shorter).
///
/// `page_size` must be non-zero; [`crate::config::SiteConfig::validate`] rejects zero.
pub fn paginate_session(
    session: &Session,
    page_size: usize,
    commits: &[CommitRef],
    image_history: &BTreeMap<String, Vec<ImageVersion>>,
) -> PagedSession {
    let page_size = page_size.max(1);
    let by_hash: HashMap<&str, &CommitRef> = commits.iter().map(|c| (c.hash.as_str(), c)).collect();
    let total_pages = session.turns.len().div_ceil(page_size);

    let mut pages = Vec::with_capacity(total_pages);
    for (i, chunk) in session.turns.chunks(page_size).enumerate() {
        let page = i + 1;
        let start_index = i * page_size;

        let hashes: BTreeSet<&str> =
            chunk.iter().filter_map(|t| t.commit.as_ref()).map(|c| c.hash.as_str()).collect();
        let mut page_commits: Vec<CommitRef> =
            hashes.iter().filter_map(|h| by_hash.get(h)).map(|c| (*c).clone()).collect();
        page_commits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.hash.cmp(&b.hash)));

        let mut image_versions: Vec<ImageVersion> = image_history
            .values()
            .flatten()
            .filter(|v| hashes.contains(v.commit_hash.as_str()))
            .cloned()
            .collect();
        image_versions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));

        pages.push(Page {
            session_id: session.id.clone(),
            page,
            total_pages,
            start_index,
            end_index: start_index + chunk.len(),
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
            turns: chunk.to_vec(),
            commits: page_commits,
            image_versions,
        });
    }

    let manifest = SessionManifest {
        session_id: session.id.clone(),
        total_turns: session.turns.len(),
        messages_per_page: page_size,
        pages: pages
            .iter()
            .map(|p| PageSummary {
                page: p.page,
                file: page_file_name(p.page),
                start_index: p.start_index,
                end_index: p.end_index,
            })
            .collect(),
    };

    PagedSession { manifest, pages }
}

pub fn paginate_sessions(
    sessions: &[Session],
    page_size: usize,
    commits: &[CommitRef],
    image_history: &BTreeMap<String, Vec<ImageVersion>>,
) -> Vec<PagedSession> {
    sessions
        .iter()
        .map(|s| paginate_session(s, page_size, commits, image_history))
        .collect()
}
