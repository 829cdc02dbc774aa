//! Service lifecycle framework
//!
//! Every long-lived component (providers included) implements [`Service`]
//! and is supervised by a [`ServiceManager`]: registration, dependency
//! validation, topologically ordered startup, and reverse-order teardown.

mod status;

pub use status::{ServiceStatus, StatusCell};

use crate::errors::CoreError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Core service trait that all managed components implement
///
/// `start()`/`stop()` are provided: they drive the status state machine
/// around the `initialize()`/`shutdown()` hooks and re-raise hook failures
/// after recording `Error` status.
#[async_trait]
pub trait Service: Send + Sync {
    /// Unique service identifier
    fn name(&self) -> &str;

    /// Reported in metadata
    fn version(&self) -> &str {
        "0.1.0"
    }

    /// Names of services that must be running before this one starts
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Status slot owned by the implementation
    fn status_cell(&self) -> &StatusCell;

    /// One-time setup hook (connectivity probe, resource allocation)
    async fn initialize(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Teardown hook; must leave the service restartable
    async fn shutdown(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn status(&self) -> ServiceStatus {
        self.status_cell().get().await
    }

    async fn start(&self) -> Result<(), CoreError> {
        self.status_cell().begin_start(self.name()).await?;
        match self.initialize().await {
            Ok(()) => {
                self.status_cell().complete_start().await;
                Ok(())
            }
            Err(e) => {
                self.status_cell().fail().await;
                Err(e)
            }
        }
    }

    async fn stop(&self) -> Result<(), CoreError> {
        self.status_cell().begin_stop(self.name()).await?;
        match self.shutdown().await {
            Ok(()) => {
                self.status_cell().complete_stop().await;
                Ok(())
            }
            Err(e) => {
                self.status_cell().fail().await;
                Err(e)
            }
        }
    }
}

/// Registration-time metadata, mutated only by the manager
#[derive(Debug, Clone, Serialize)]
pub struct ServiceMetadata {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub is_active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub status: ServiceStatus,
}

struct ServiceEntry {
    service: Arc<dyn Service>,
    metadata: ServiceMetadata,
}

/// Registry, dependency resolution, and ordered lifecycle execution
///
/// Teardown contract: `stop_all()` walks the exact reverse of the startup
/// order, so dependents stop before their dependencies. Deregistration of
/// a running service is a hard failure; callers must stop it first.
pub struct ServiceManager {
    services: HashMap<String, ServiceEntry>,
    startup_order: Vec<String>,
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            startup_order: Vec::new(),
        }
    }

    /// Register a service under its own name
    pub fn register(&mut self, service: Arc<dyn Service>) -> Result<(), CoreError> {
        let name = service.name().to_string();
        if self.services.contains_key(&name) {
            return Err(CoreError::duplicate_service(&name));
        }

        let metadata = ServiceMetadata {
            name: name.clone(),
            version: service.version().to_string(),
            dependencies: service.dependencies(),
            is_active: false,
            start_time: None,
            status: ServiceStatus::Pending,
        };

        logger::debug(
            LogTag::Services,
            &format!(
                "Registered service: {} (deps={:?})",
                name, metadata.dependencies
            ),
        );

        self.services.insert(name, ServiceEntry { service, metadata });
        // Startup order is stale once the registry changes
        self.startup_order.clear();
        Ok(())
    }

    /// Remove a service from the registry; fails while it is running
    pub async fn deregister(&mut self, name: &str) -> Result<(), CoreError> {
        let entry = self
            .services
            .get(name)
            .ok_or_else(|| CoreError::not_found(name))?;

        let status = entry.service.status().await;
        if status == ServiceStatus::Running {
            return Err(CoreError::invalid_state(name, status, "deregister"));
        }

        self.services.remove(name);
        self.startup_order.clear();
        logger::debug(LogTag::Services, &format!("Deregistered service: {}", name));
        Ok(())
    }

    /// Validate the dependency graph and compute the startup order
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        for entry in self.services.values() {
            for dep in &entry.metadata.dependencies {
                if !self.services.contains_key(dep) {
                    return Err(CoreError::missing_dependency(&entry.metadata.name, dep));
                }
            }
        }

        self.startup_order = self.resolve_startup_order()?;
        logger::info(
            LogTag::Services,
            &format!("Service startup order: {:?}", self.startup_order),
        );
        Ok(())
    }

    /// Start every service in dependency order; fail-fast on the first error
    pub async fn start_all(&mut self) -> Result<(), CoreError> {
        if self.startup_order.is_empty() {
            self.initialize()?;
        }

        logger::info(LogTag::Services, "Starting all services");

        let order = self.startup_order.clone();
        for name in order {
            let entry = match self.services.get_mut(&name) {
                Some(entry) => entry,
                None => continue,
            };

            if entry.metadata.is_active {
                continue;
            }

            logger::info(LogTag::Services, &format!("Starting service: {}", name));
            entry.metadata.status = ServiceStatus::Starting;

            match entry.service.start().await {
                Ok(()) => {
                    entry.metadata.is_active = true;
                    entry.metadata.start_time = Some(Utc::now());
                    entry.metadata.status = ServiceStatus::Running;
                    logger::info(LogTag::Services, &format!("Service started: {}", name));
                }
                Err(e) => {
                    entry.metadata.status = ServiceStatus::Error;
                    logger::error(
                        LogTag::Services,
                        &format!("Service failed to start: {}: {}", name, e),
                    );
                    // Fail fast; already-started services are left running
                    return Err(e);
                }
            }
        }

        logger::info(LogTag::Services, "All services started");
        Ok(())
    }

    /// Stop every active service, dependents before their dependencies
    ///
    /// Best-effort: a failing `stop()` is recorded and the walk continues so
    /// one broken service does not leak resources held by the rest. If any
    /// stop failed, an aggregate error naming the failures is raised.
    pub async fn stop_all(&mut self) -> Result<(), CoreError> {
        logger::info(LogTag::Services, "Stopping all services");

        let mut order = if self.startup_order.is_empty() {
            self.resolve_startup_order()?
        } else {
            self.startup_order.clone()
        };
        order.reverse();

        let mut failures: Vec<(String, String)> = Vec::new();

        for name in order {
            let entry = match self.services.get_mut(&name) {
                Some(entry) => entry,
                None => continue,
            };

            if !entry.metadata.is_active {
                continue;
            }

            logger::info(LogTag::Services, &format!("Stopping service: {}", name));
            entry.metadata.status = ServiceStatus::Stopping;

            match entry.service.stop().await {
                Ok(()) => {
                    entry.metadata.is_active = false;
                    entry.metadata.start_time = None;
                    entry.metadata.status = ServiceStatus::Stopped;
                    logger::info(LogTag::Services, &format!("Service stopped: {}", name));
                }
                Err(e) => {
                    entry.metadata.is_active = false;
                    entry.metadata.status = ServiceStatus::Error;
                    logger::error(
                        LogTag::Services,
                        &format!("Service failed to stop: {}: {}", name, e),
                    );
                    failures.push((name.clone(), e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            logger::info(LogTag::Services, "All services stopped");
            Ok(())
        } else {
            Err(CoreError::shutdown_failed(&failures))
        }
    }

    /// Defensive copy of one service's metadata
    pub fn service_metadata(&self, name: &str) -> Result<ServiceMetadata, CoreError> {
        self.services
            .get(name)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| CoreError::not_found(name))
    }

    /// Defensive copies of every service's metadata
    pub fn all_metadata(&self) -> Vec<ServiceMetadata> {
        let mut all: Vec<ServiceMetadata> = self
            .services
            .values()
            .map(|entry| entry.metadata.clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Depth-first topological sort with cycle detection
    ///
    /// Roots are visited in lexicographic order so the result is
    /// deterministic for a given registry.
    fn resolve_startup_order(&self) -> Result<Vec<String>, CoreError> {
        fn visit(
            name: &str,
            services: &HashMap<String, ServiceEntry>,
            ordered: &mut Vec<String>,
            visited: &mut HashSet<String>,
            visiting: &mut HashSet<String>,
        ) -> Result<(), CoreError> {
            if visited.contains(name) {
                return Ok(());
            }
            if visiting.contains(name) {
                return Err(CoreError::circular_dependency(name));
            }

            visiting.insert(name.to_string());

            if let Some(entry) = services.get(name) {
                for dep in &entry.metadata.dependencies {
                    visit(dep, services, ordered, visited, visiting)?;
                }
            }

            visiting.remove(name);
            visited.insert(name.to_string());
            ordered.push(name.to_string());
            Ok(())
        }

        let mut roots: Vec<&String> = self.services.keys().collect();
        roots.sort();

        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();

        for name in roots {
            visit(
                name,
                &self.services,
                &mut ordered,
                &mut visited,
                &mut visiting,
            )?;
        }

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::sync::Mutex;

    /// Test double that records start/stop events into a shared log
    struct TestService {
        name: &'static str,
        deps: Vec<String>,
        state: StatusCell,
        events: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
        fail_stop: bool,
    }

    impl TestService {
        fn new(name: &'static str, deps: &[&str], events: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                deps: deps.iter().map(|d| d.to_string()).collect(),
                state: StatusCell::new(),
                events,
                fail_start: false,
                fail_stop: false,
            })
        }

        fn failing_start(
            name: &'static str,
            events: Arc<Mutex<Vec<String>>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                deps: Vec::new(),
                state: StatusCell::new(),
                events,
                fail_start: true,
                fail_stop: false,
            })
        }

        fn failing_stop(
            name: &'static str,
            events: Arc<Mutex<Vec<String>>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                deps: Vec::new(),
                state: StatusCell::new(),
                events,
                fail_start: false,
                fail_stop: true,
            })
        }
    }

    #[async_trait]
    impl Service for TestService {
        fn name(&self) -> &str {
            self.name
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.clone()
        }

        fn status_cell(&self) -> &StatusCell {
            &self.state
        }

        async fn initialize(&self) -> Result<(), CoreError> {
            if self.fail_start {
                return Err(CoreError::api_error(self.name, "initialize", "probe failed"));
            }
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", self.name));
            Ok(())
        }

        async fn shutdown(&self) -> Result<(), CoreError> {
            if self.fail_stop {
                return Err(CoreError::api_error(self.name, "shutdown", "flush failed"));
            }
            self.events
                .lock()
                .unwrap()
                .push(format!("stop:{}", self.name));
            Ok(())
        }
    }

    fn events() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn starts_dependencies_before_dependents_and_stops_in_reverse() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("logger", &[], log.clone()))
            .unwrap();
        manager
            .register(TestService::new("auth", &["logger"], log.clone()))
            .unwrap();

        manager.initialize().unwrap();
        manager.start_all().await.unwrap();
        manager.stop_all().await.unwrap();

        let recorded = log.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec!["start:logger", "start:auth", "stop:auth", "stop:logger"]
        );
    }

    #[tokio::test]
    async fn transitive_dependencies_start_first() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("c", &["b"], log.clone()))
            .unwrap();
        manager
            .register(TestService::new("a", &[], log.clone()))
            .unwrap();
        manager
            .register(TestService::new("b", &["a"], log.clone()))
            .unwrap();

        manager.start_all().await.unwrap();

        let recorded = log.lock().unwrap().clone();
        assert_eq!(recorded, vec!["start:a", "start:b", "start:c"]);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_without_touching_metadata() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("logger", &[], log.clone()))
            .unwrap();

        let err = manager
            .register(TestService::new("logger", &["other"], log.clone()))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateService);

        let metadata = manager.service_metadata("logger").unwrap();
        assert!(metadata.dependencies.is_empty());
    }

    #[tokio::test]
    async fn circular_dependency_is_detected() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("a", &["b"], log.clone()))
            .unwrap();
        manager
            .register(TestService::new("b", &["a"], log.clone()))
            .unwrap();

        let err = manager.initialize().unwrap_err();
        assert_eq!(err.code(), ErrorCode::CircularDependency);
    }

    #[tokio::test]
    async fn missing_dependency_is_reported_by_name() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("auth", &["logger"], log.clone()))
            .unwrap();

        let err = manager.initialize().unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingDependency);
        assert!(err.to_string().contains("logger"));
    }

    #[tokio::test]
    async fn starting_twice_fails_the_second_call_directly_on_the_service() {
        let log = events();
        let service = TestService::new("solo", &[], log.clone());
        service.start().await.unwrap();

        let err = service.start().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
        assert_eq!(service.status().await, ServiceStatus::Running);
    }

    #[tokio::test]
    async fn start_all_skips_already_active_services() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("logger", &[], log.clone()))
            .unwrap();

        manager.start_all().await.unwrap();
        manager.start_all().await.unwrap();

        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn start_failure_is_fail_fast_and_recorded() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("a", &[], log.clone()))
            .unwrap();
        manager
            .register(TestService::failing_start("b", log.clone()))
            .unwrap();
        manager
            .register(TestService::new("c", &["b"], log.clone()))
            .unwrap();

        let err = manager.start_all().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiError);

        // a started before the failure; c never started
        let recorded = log.lock().unwrap().clone();
        assert_eq!(recorded, vec!["start:a"]);

        let metadata = manager.service_metadata("b").unwrap();
        assert_eq!(metadata.status, ServiceStatus::Error);
        assert!(!metadata.is_active);
    }

    #[tokio::test]
    async fn stop_all_is_best_effort_and_aggregates_failures() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("a", &[], log.clone()))
            .unwrap();
        manager
            .register(TestService::failing_stop("b", log.clone()))
            .unwrap();

        manager.start_all().await.unwrap();
        let err = manager.stop_all().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShutdownFailed);
        assert!(err.to_string().contains("b"));

        // a was still stopped despite b failing
        assert!(log.lock().unwrap().contains(&"stop:a".to_string()));
        assert_eq!(
            manager.service_metadata("b").unwrap().status,
            ServiceStatus::Error
        );
    }

    #[tokio::test]
    async fn deregister_requires_the_service_to_be_stopped() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("logger", &[], log.clone()))
            .unwrap();
        manager.start_all().await.unwrap();

        let err = manager.deregister("logger").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);

        manager.stop_all().await.unwrap();
        manager.deregister("logger").await.unwrap();

        let err = manager.deregister("logger").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn metadata_reflects_lifecycle_and_copies_are_defensive() {
        let log = events();
        let mut manager = ServiceManager::new();
        manager
            .register(TestService::new("logger", &[], log.clone()))
            .unwrap();

        let before = manager.service_metadata("logger").unwrap();
        assert_eq!(before.status, ServiceStatus::Pending);
        assert!(before.start_time.is_none());

        manager.start_all().await.unwrap();

        // The earlier copy is unchanged; a fresh copy sees the new state
        assert_eq!(before.status, ServiceStatus::Pending);
        let after = manager.service_metadata("logger").unwrap();
        assert_eq!(after.status, ServiceStatus::Running);
        assert!(after.is_active);
        assert!(after.start_time.is_some());

        assert_eq!(manager.all_metadata().len(), 1);
        let err = manager.service_metadata("missing").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
