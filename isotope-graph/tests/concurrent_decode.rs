use std::thread;

use isotope_graph::{ByteSize, ServiceType, decode};

fn document(service_type: &str, request_size: &str, replicas: u32) -> String {
    format!(
        r#"{{
            "defaults": {{
                "type": "{service_type}",
                "requestSize": "{request_size}",
                "numReplicas": {replicas}
            }},
            "services": [
                {{ "name": "a", "script": [[{{ "service": "b" }}, {{ "service": "c" }}]] }},
                {{ "name": "b" }},
                {{ "name": "c", "script": [{{ "service": "a" }}] }}
            ]
        }}"#
    )
}

#[test]
fn concurrent_decodes_keep_their_own_defaults() {
    let http = document("HTTP", "1KB", 2);
    let grpc = document("gRPC", "7KiB", 9);

    thread::scope(|scope| {
        let mut handles = Vec::new();
        for i in 0..16 {
            let (doc, expected_type, expected_size, expected_replicas) = if i % 2 == 0 {
                (&http, ServiceType::Http, 1000, 2)
            } else {
                (&grpc, ServiceType::Grpc, 7 * 1024, 9)
            };

            handles.push(scope.spawn(move || {
                for _ in 0..50 {
                    let graph = decode::from_json(doc).unwrap();
                    for service in &graph.services {
                        assert_eq!(service.service_type, expected_type);
                        assert_eq!(service.num_replicas, expected_replicas);
                        for request in service.script.requests() {
                            assert_eq!(request.size, ByteSize::from_bytes(expected_size));
                        }
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    });
}

#[test]
fn failed_decode_does_not_affect_later_decodes() {
    let broken = r#"{
        "defaults": { "numReplicas": 42, "errorRate": "1%" },
        "services": [{ "name": "a", "script": [{ "service": "missing" }] }]
    }"#;
    assert!(decode::from_json(broken).is_err());

    let graph = decode::from_json(r#"{ "services": [{ "name": "a" }] }"#).unwrap();
    assert_eq!(graph.services[0].num_replicas, 1);
    assert_eq!(graph.services[0].error_rate.value(), 0.0);
}
