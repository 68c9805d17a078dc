use isotope_graph::{
    ByteSize, Command, ConcurrentCommand, GeneratorConfig, RequestCommand, Script, Service,
    ServiceGraph, ServiceTypeSelection, decode, generate, seeded_sampler,
};

fn config() -> GeneratorConfig {
    GeneratorConfig {
        number_of_services: 40,
        subtree_height: 3,
        request_size: ByteSize::from_bytes(1536),
        clusters: vec!["us-east".into(), "us-west".into(), "eu".into()],
        ingress_gateway_endpoint: "10.0.0.1".into(),
        service_type: ServiceTypeSelection::Random,
        ..Default::default()
    }
}

#[test]
fn yaml_round_trip() {
    let graph = generate(&config(), seeded_sampler(1)).unwrap();

    let yaml = graph.to_yaml().unwrap();
    let decoded = decode::from_yaml(&yaml).unwrap();

    assert_eq!(decoded.services, graph.services);
    assert_eq!(decoded, graph);
}

#[test]
fn json_round_trip() {
    let graph = generate(&config(), seeded_sampler(2)).unwrap();

    let json = graph.to_json().unwrap();
    let decoded = decode::from_json(&json).unwrap();

    assert_eq!(decoded.services, graph.services);
    assert_eq!(decoded, graph);
}

#[test]
fn json_round_trip_of_deep_scripts() {
    let mut command = Command::from(RequestCommand::new("a", ByteSize::from_bytes(10)));
    for _ in 0..200 {
        command = ConcurrentCommand(vec![command]).into();
    }

    let mut service = Service::new("a");
    service.script = Script(vec![command]);
    let graph = ServiceGraph {
        global: Default::default(),
        services: vec![service],
    };

    let json = graph.to_json().unwrap();
    assert_eq!(decode::from_json(&json).unwrap(), graph);
}

#[test]
fn json_documents_decode_as_yaml() {
    let graph = generate(&config(), seeded_sampler(3)).unwrap();

    let json = graph.to_json().unwrap();
    let decoded = decode::from_yaml(&json).unwrap();

    assert_eq!(decoded, graph);
}

#[test]
fn encodes_document_schema() {
    let mut config = config();
    config.number_of_services = 2;
    config.service_type = ServiceTypeSelection::default();
    let graph = generate(&config, |range: std::ops::Range<usize>| range.start).unwrap();

    let json: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "global": {
                "ingress_gateway_endpoint": "10.0.0.1",
                "load_generator_cluster": "us-east",
            },
            "services": [
                {
                    "name": "s0",
                    "type": "HTTP",
                    "numReplicas": 6,
                    "errorRate": "0%",
                    "responseSize": "100KB",
                    "requestSize": "1536B",
                    "script": [[{ "service": "s1", "size": "1536B" }]],
                    "clusterContext": "us-east",
                    "isEntrypoint": true,
                    "numRbacPolicies": 0,
                },
                {
                    "name": "s1",
                    "type": "HTTP",
                    "numReplicas": 6,
                    "errorRate": "0%",
                    "responseSize": "100KB",
                    "requestSize": "1536B",
                    "script": [],
                    "clusterContext": "us-east",
                    "isEntrypoint": false,
                    "numRbacPolicies": 0,
                },
            ],
        })
    );
}
