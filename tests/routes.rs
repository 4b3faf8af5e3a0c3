use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use cluster_deployer::{
    app,
    services::cluster::ClusterClient,
    utilities::{app_state::AppState, config::Config, errors::AppError},
};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Pod, Service};
use mockall::mock;
use serde_json::{Value, json};
use tower::ServiceExt;

mock! {
    pub Cluster {}

    #[async_trait]
    impl ClusterClient for Cluster {
        async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<(), AppError>;
        async fn create_service(&self, namespace: &str, service: &Service) -> Result<(), AppError>;
        async fn create_or_replace_autoscaler(&self, namespace: &str, autoscaler: &HorizontalPodAutoscaler) -> Result<(), AppError>;
        async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), AppError>;
        async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, AppError>;
        async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, AppError>;
    }
}

fn router(cluster: MockCluster) -> Router {
    let config = Config {
        image_registry: "registry.local/".to_string(),
        ..Default::default()
    };
    app(AppState::with_cluster(config, Arc::new(cluster))).unwrap()
}

fn request_body() -> Value {
    json!({
        "serviceName": "foo-bar",
        "deployMode": "Deployment",
        "imageName": "foo-bar",
        "imageVersion": "1.0.3",
        "port": 8080,
        "nodePort": 30080,
        "cpu": 1,
        "memory": 2,
        "minReplicas": 1,
        "maxReplicas": 3,
        "targetCPUUtilizationPercentage": 80
    })
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn conflict() -> AppError {
    let status = serde_json::from_value(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": "deployments.apps \"foo-bar\" already exists",
        "reason": "AlreadyExists",
        "code": 409,
    }))
    .unwrap();
    AppError::KubeError(kube::Error::Api(status))
}

#[tokio::test]
async fn create_returns_created_with_all_steps() {
    let mut cluster = MockCluster::new();
    cluster
        .expect_create_deployment()
        .times(1)
        .returning(|_, _| Ok(()));
    cluster
        .expect_create_service()
        .times(1)
        .returning(|_, _| Ok(()));
    cluster
        .expect_create_or_replace_autoscaler()
        .times(1)
        .returning(|_, _| Ok(()));

    let response = router(cluster)
        .oneshot(json_request("POST", "/api/v1/deployments", &request_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["serviceName"], "foo-bar");
    assert_eq!(
        body["completedSteps"],
        json!(["deployment", "service", "autoscaler"])
    );
}

#[tokio::test]
async fn create_reports_failed_step() {
    let mut cluster = MockCluster::new();
    cluster
        .expect_create_deployment()
        .returning(|_, _| Ok(()));
    cluster
        .expect_create_service()
        .returning(|_, _| Err(conflict()));
    cluster.expect_create_or_replace_autoscaler().never();

    let response = router(cluster)
        .oneshot(json_request("POST", "/api/v1/deployments", &request_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["failedStep"], "service");
    assert_eq!(body["completedSteps"], json!(["deployment"]));
}

#[tokio::test]
async fn invalid_request_is_rejected_before_submission() {
    let mut cluster = MockCluster::new();
    cluster.expect_create_deployment().never();

    let mut body = request_body();
    body["port"] = json!(0);

    let response = router(cluster)
        .oneshot(json_request("POST", "/api/v1/deployments", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn start_conflict_is_surfaced() {
    let mut cluster = MockCluster::new();
    cluster
        .expect_create_deployment()
        .times(1)
        .returning(|_, _| Err(conflict()));
    cluster.expect_create_service().never();

    let response = router(cluster)
        .oneshot(json_request(
            "POST",
            "/api/v1/services/start",
            &request_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_succeeds_even_when_cluster_fails() {
    let mut cluster = MockCluster::new();
    cluster
        .expect_delete_deployment()
        .withf(|ns, name| ns == "default" && name == "ghost")
        .times(1)
        .returning(|_, _| Err(AppError::NotFoundError("ghost".to_string())));

    let response = router(cluster)
        .oneshot(empty_request("DELETE", "/api/v1/services/ghost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn containers_lists_matching_pods() {
    let mut cluster = MockCluster::new();
    cluster.expect_list_replica_sets().returning(|_| {
        Ok(vec![
            serde_json::from_value(json!({
                "apiVersion": "apps/v1",
                "kind": "ReplicaSet",
                "metadata": { "name": "foo-bar-7c9f" }
            }))
            .unwrap(),
        ])
    });
    cluster.expect_list_pods().returning(|_| {
        Ok(vec![
            serde_json::from_value(json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {
                    "name": "foo-bar-7c9f-abcde",
                    "uid": "0f3c",
                    "creationTimestamp": "2018-01-24T09:02:19Z"
                },
                "status": { "hostIP": "10.0.0.5", "podIP": "172.16.1.9" }
            }))
            .unwrap(),
        ])
    });

    let response = router(cluster)
        .oneshot(empty_request("GET", "/api/v1/services/foo-bar/containers"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["podName"], "foo-bar-7c9f-abcde");
    assert_eq!(body["data"][0]["uid"], "0f3c");
    assert_eq!(body["data"][0]["hostAddress"], "10.0.0.5");
    assert_eq!(body["data"][0]["podAddress"], "172.16.1.9");
    assert_eq!(body["data"][0]["createdAt"], "2018-01-24T09:02:19Z");
}

#[tokio::test]
async fn containers_on_empty_cluster_is_empty_list() {
    let mut cluster = MockCluster::new();
    cluster.expect_list_replica_sets().returning(|_| Ok(vec![]));
    cluster.expect_list_pods().returning(|_| Ok(vec![]));

    let response = router(cluster)
        .oneshot(empty_request("GET", "/api/v1/services/foo-bar/containers"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"total": 0, "data": []}));
}

#[tokio::test]
async fn logs_return_placeholder_text() {
    let response = router(MockCluster::new())
        .oneshot(empty_request("GET", "/api/v1/logs/default/foo-bar-7c9f-abcde"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"log is empty");
}
