use std::{path::Path, sync::Arc};

use color_eyre::eyre;

use dar_config::{Config, StorageBackend};
use dar_service::{DarService, HttpGenerativeProvider, PgKnowledgeBase, ResponseRouter};
use dar_storage::{
	db::Db,
	file::{self, FileKnowledgeBase},
};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DarService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let generative = Arc::new(HttpGenerativeProvider::new(config.providers.generative.clone()));
		let service = match config.storage.backend {
			StorageBackend::File => {
				let Some(seed) = config.storage.file.as_ref() else {
					return Err(eyre::eyre!("storage.file is required for the file backend."));
				};
				let knowledge = Arc::new(FileKnowledgeBase::load(&seed.path)?);

				tracing::info!(
					path = %seed.path,
					entries = knowledge.snapshot().len(),
					"Knowledge file loaded."
				);

				let router = ResponseRouter::from_config(&config, knowledge.clone(), generative);

				DarService::with_file_knowledge(router, knowledge)
			},
			StorageBackend::Postgres => {
				let Some(postgres) = config.storage.postgres.as_ref() else {
					return Err(eyre::eyre!("storage.postgres is required for the postgres backend."));
				};
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				let knowledge = PgKnowledgeBase::new(db);

				if let Some(seed) = config.storage.file.as_ref() {
					let entries = file::read_entries(Path::new(&seed.path))?;
					let imported = knowledge.import(&entries).await?;

					tracing::info!(path = %seed.path, entries = imported, "Knowledge seed imported.");
				}

				let router = ResponseRouter::from_config(&config, Arc::new(knowledge), generative);

				DarService::new(router)
			},
		};

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: DarService) -> Self {
		Self { service: Arc::new(service) }
	}
}
