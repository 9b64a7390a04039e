// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{container, workload};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EmptyDirVolumeSource, EnvVar, PodSpec, PodTemplateSpec,
    ResourceRequirements, Service, ServicePort, ServiceSpec, Toleration, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Identity of the model server workload; everything else is fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub namespace: String,
    pub name: String,
    pub image: String,
}

impl Default for WorkloadSpec {
    fn default() -> Self {
        Self {
            namespace: workload::NAMESPACE.to_string(),
            name: workload::APP_NAME.to_string(),
            image: workload::IMAGE.to_string(),
        }
    }
}

impl WorkloadSpec {
    fn app_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(workload::APP_LABEL.to_string(), self.name.clone())])
    }

    fn metadata(&self, labels: Option<BTreeMap<String, String>>) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels,
            ..Default::default()
        }
    }

    /// Single-replica Deployment pinned to the dedicated node pool
    pub fn deployment(&self) -> Deployment {
        let labels = self.app_labels();

        Deployment {
            metadata: self.metadata(Some(labels.clone())),
            spec: Some(DeploymentSpec {
                replicas: Some(container::REPLICAS),
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(self.pod_spec()),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod_spec(&self) -> PodSpec {
        PodSpec {
            node_selector: Some(BTreeMap::from([(
                workload::NODE_SELECTOR_KEY.to_string(),
                self.name.clone(),
            )])),
            tolerations: Some(vec![Toleration {
                key: Some(workload::TOLERATION_KEY.to_string()),
                operator: Some("Equal".to_string()),
                value: Some(self.name.clone()),
                effect: Some("NoSchedule".to_string()),
                ..Default::default()
            }]),
            containers: vec![self.container()],
            volumes: Some(vec![Volume {
                name: container::MODEL_VOLUME.to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    fn container(&self) -> Container {
        let quantities = |cpu: &str, memory: &str| {
            BTreeMap::from([
                ("cpu".to_string(), Quantity(cpu.to_string())),
                ("memory".to_string(), Quantity(memory.to_string())),
            ])
        };

        Container {
            name: self.name.clone(),
            image: Some(self.image.clone()),
            resources: Some(ResourceRequirements {
                limits: Some(quantities(container::CPU_LIMIT, container::MEMORY_LIMIT)),
                requests: Some(quantities(container::CPU_REQUEST, container::MEMORY_REQUEST)),
                ..Default::default()
            }),
            ports: Some(vec![ContainerPort {
                container_port: container::PORT,
                name: Some(container::PORT_NAME.to_string()),
                ..Default::default()
            }]),
            env: Some(vec![EnvVar {
                name: container::MODEL_PATH_ENV.to_string(),
                value: Some(container::MODEL_PATH.to_string()),
                ..Default::default()
            }]),
            volume_mounts: Some(vec![VolumeMount {
                name: container::MODEL_VOLUME.to_string(),
                mount_path: container::MODEL_MOUNT_PATH.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    /// LoadBalancer Service forwarding port 80 to the container port
    pub fn service(&self) -> Service {
        Service {
            metadata: self.metadata(None),
            spec: Some(ServiceSpec {
                selector: Some(self.app_labels()),
                ports: Some(vec![ServicePort {
                    port: container::SERVICE_PORT,
                    target_port: Some(IntOrString::Int(container::PORT)),
                    ..Default::default()
                }]),
                type_: Some("LoadBalancer".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
