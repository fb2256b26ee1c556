use std::sync::Arc;
use tokio::time::Duration;

use crate::config::AppConfig;
use crate::modules::blog::{BlogService, BlogStore};
use crate::modules::cache::QueryCache;
use crate::modules::calendar::{CalendarService, CalendarStore};
use crate::modules::career::{CareerService, CareerStore};
use crate::modules::profile::{ProfileStore, Session, UserService};
use crate::modules::project::{ProjectService, ProjectStore};
use crate::modules::remote::http::ReqwestExec;
use crate::modules::remote::{PostgrestClient, StorageClient, SupabaseStorage, TableClient};
use crate::modules::review::{ReviewService, ReviewStore};
use crate::modules::search::{SearchService, SearchStore};
use crate::modules::storage::StorageService;
use crate::modules::technology::{TechnologyService, TechnologyStore};

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
const SEARCH_LIMIT: u32 = 5;

/// Composition root: one shared HTTP executor, one query cache, one session,
/// and every entity store wired on top.
pub struct AppState {
    pub config: AppConfig,
    pub cache: QueryCache,
    pub session: Arc<Session>,
    pub projects: ProjectStore,
    pub technologies: TechnologyStore,
    pub posts: BlogStore,
    pub calendar: CalendarStore,
    pub reviews: ReviewStore,
    pub careers: CareerStore,
    pub profiles: ProfileStore,
    pub storage: StorageService,
    pub search: SearchStore,
}

impl AppState {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn new(config: AppConfig) -> Self {
        let exec = Arc::new(ReqwestExec::new());
        let client: Arc<dyn TableClient> = Arc::new(PostgrestClient::new(
            exec.clone(),
            &config.supabase_url,
            &config.supabase_anon_key,
        ));
        let storage_client: Arc<dyn StorageClient> = Arc::new(SupabaseStorage::new(
            exec,
            &config.supabase_url,
            &config.supabase_anon_key,
        ));

        let cache = QueryCache::with_defaults();
        let session = Arc::new(Session::new(client.clone(), &config.default_user_email));

        let projects = ProjectStore::new(
            Arc::new(ProjectService::new(client.clone(), session.clone())),
            cache.clone(),
        );
        let technologies = TechnologyStore::new(
            Arc::new(TechnologyService::new(client.clone())),
            cache.clone(),
        );
        let posts = BlogStore::new(Arc::new(BlogService::new(client.clone())), cache.clone());
        let calendar = CalendarStore::new(
            Arc::new(CalendarService::new(client.clone())),
            cache.clone(),
        );
        let reviews = ReviewStore::new(
            Arc::new(ReviewService::new(client.clone())),
            cache.clone(),
        );
        let careers = CareerStore::new(
            Arc::new(CareerService::new(client.clone(), session.clone())),
            cache.clone(),
        );
        let profiles = ProfileStore::new(Arc::new(UserService::new(client.clone())), cache.clone());
        let storage = StorageService::new(storage_client, &config.storage_bucket);
        let search = SearchStore::new(
            Arc::new(SearchService::new(client, SEARCH_LIMIT)),
            cache.clone(),
            SEARCH_DEBOUNCE,
        );

        Self {
            config,
            cache,
            session,
            projects,
            technologies,
            posts,
            calendar,
            reviews,
            careers,
            profiles,
            storage,
            search,
        }
    }
}
