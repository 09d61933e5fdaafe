//! On-disk project tree for artifact checks.

use super::fakes::{FakeRunner, FakeTransport, BACKEND, FRONTEND};
use pipecheck::checks::CheckContext;
use pipecheck::config::{Settings, TargetOverrides};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const BACKEND_DOCKERFILE: &str = r#"FROM python:3.11-slim
WORKDIR /app
COPY backend/requirements.txt .
RUN pip install --no-cache-dir -r requirements.txt
COPY backend/ .
RUN useradd --create-home app
USER app
EXPOSE 8001
HEALTHCHECK --interval=30s CMD curl -f http://localhost:8001/api/ || exit 1
CMD ["uvicorn", "server:app", "--host", "0.0.0.0", "--port", "8001"]
"#;

pub const FRONTEND_DOCKERFILE: &str = r#"FROM node:20-alpine AS build
WORKDIR /app
COPY frontend/ .
RUN yarn install && yarn build

FROM nginx:alpine
COPY --from=build /app/build /usr/share/nginx/html
USER nginx
HEALTHCHECK CMD wget -q --spider http://localhost:3000/ || exit 1
"#;

pub fn deployment(name: &str) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}
spec:
  replicas: 2
  selector:
    matchLabels:
      app: {name}
  template:
    metadata:
      labels:
        app: {name}
    spec:
      securityContext:
        runAsNonRoot: true
        runAsUser: 1000
      containers:
        - name: {name}
          image: registry.example.com/{name}:latest
          resources:
            requests:
              cpu: 100m
              memory: 128Mi
            limits:
              cpu: 500m
              memory: 512Mi
"#
    )
}

pub const SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: backend
spec:
  ports:
    - port: 8001
"#;

pub fn application(env: &str) -> String {
    format!(
        r#"apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: app-{env}
  namespace: argocd
spec:
  project: app-project
  source:
    repoURL: https://git.example.com/app.git
    path: k8s/overlays/{env}
  destination:
    server: https://kubernetes.default.svc
    namespace: app-{env}
  syncPolicy:
    automated:
      prune: true
"#
    )
}

pub const PROJECT: &str = r#"apiVersion: argoproj.io/v1alpha1
kind: AppProject
metadata:
  name: app-project
spec:
  sourceRepos:
    - https://git.example.com/app.git
  destinations:
    - namespace: 'app-*'
      server: https://kubernetes.default.svc
"#;

pub const JENKINSFILE: &str = r#"pipeline {
    agent any
    stages {
        stage('Checkout') {
            steps { checkout scm }
        }
        stage('Install Dependencies') {
            steps { sh 'pip install -r backend/requirements.txt' }
        }
        stage('Code Quality & Security') {
            steps {
                withSonarQubeEnv('SonarQube') { sh 'sonar-scanner' }
                sh 'semgrep --config=p/security-audit .' // Semgrep SAST
            }
        }
        stage('Unit Tests') {
            steps { sh 'pytest' }
        }
        stage('Build Docker Images') {
            steps { sh 'docker build -f Dockerfile.backend .' }
        }
        stage('Container Security Scan') {
            steps { sh 'trivy image backend:latest' }
        }
        stage('DAST') {
            steps { sh 'zap-baseline.py -t $STAGING_URL' } // OWASP ZAP
        }
    }
}
"#;

/// A temporary project root holding every artifact the checks read
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Tree that passes every artifact check
    pub fn healthy() -> Self {
        let fixture = ProjectFixture {
            dir: TempDir::new().unwrap(),
        };
        fixture.write("Dockerfile.backend", BACKEND_DOCKERFILE);
        fixture.write("Dockerfile.frontend", FRONTEND_DOCKERFILE);
        fixture.write("k8s/base/backend-deployment.yaml", &deployment("backend"));
        fixture.write("k8s/base/frontend-deployment.yaml", &deployment("frontend"));
        fixture.write("k8s/base/backend-service.yaml", SERVICE);
        fixture.write("argocd/applications/app-dev.yaml", &application("dev"));
        fixture.write("argocd/applications/app-hml.yaml", &application("hml"));
        fixture.write("argocd/projects/app-project.yaml", PROJECT);
        fixture.write("Jenkinsfile", JENKINSFILE);
        fs::create_dir_all(fixture.root().join("backend")).unwrap();
        fixture
    }

    /// Tree with nothing in it
    pub fn empty() -> Self {
        ProjectFixture {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    /// Rewrite an artifact, replacing one literal
    pub fn replace(&self, relative: &str, from: &str, to: &str) {
        let content = self.read(relative);
        assert!(content.contains(from), "{} does not contain {:?}", relative, from);
        self.write(relative, &content.replacen(from, to, 1));
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).unwrap();
    }

    pub fn settings(&self) -> Settings {
        let overrides = TargetOverrides {
            backend_url: Some(BACKEND.to_string()),
            frontend_url: Some(FRONTEND.to_string()),
            root: Some(self.root().to_path_buf()),
            lenient_scans: false,
        };
        Settings::resolve(&overrides, None)
    }

    /// Context over this tree with the given fakes
    pub fn context(&self, http: FakeTransport, runner: FakeRunner) -> CheckContext {
        CheckContext::new(self.settings())
            .with_transport(http)
            .with_runner(runner)
    }

    /// Context over this tree with healthy services and clean scanners
    pub fn healthy_context(&self) -> CheckContext {
        self.context(FakeTransport::healthy(), FakeRunner::clean())
    }
}
