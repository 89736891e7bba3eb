use orbit_viewer::{
    data_structures::{
        model::SubMesh,
        scene_graph::{SourceMesh, SourceNode, SourceScene},
    },
    resources::{
        flatten_scene,
        mesh::{DEFAULT_NORMAL, DEFAULT_TEX_COORDS},
    },
};

use crate::common::test_utils::{fan_mesh, flat_scene};

mod common;

#[test]
fn quad_becomes_one_submesh() {
    let quad = SourceMesh {
        name: "quad".to_string(),
        positions: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        faces: vec![[0, 1, 2], [0, 2, 3]],
        material_index: 0,
        ..Default::default()
    };
    let buffers = flatten_scene(&flat_scene(vec![quad])).expect("scene flattens");

    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(buffers.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(
        buffers.submeshes,
        vec![SubMesh {
            index_count: 6,
            base_index: 0,
            base_vertex: 0,
            material_index: 0,
        }]
    );
}

#[test]
fn indices_stay_mesh_local() {
    let buffers = flatten_scene(&flat_scene(vec![fan_mesh(4, 0), fan_mesh(5, 1)]))
        .expect("scene flattens");

    assert_eq!(buffers.vertices.len(), 9);
    assert_eq!(buffers.submeshes.len(), 2);
    let second = buffers.submeshes[1];
    assert_eq!(second.base_vertex, 4);
    assert_eq!(second.base_index, 6);
    assert_eq!(second.index_count, 9);
    // local indices, not offset by the first mesh's vertices
    assert_eq!(&buffers.indices[6..], &[0, 1, 2, 0, 2, 3, 0, 3, 4]);
}

#[test]
fn submeshes_partition_the_index_buffer() {
    let meshes = (3..9).map(|n| fan_mesh(n, n as u32)).collect();
    let buffers = flatten_scene(&flat_scene(meshes)).expect("scene flattens");

    let mut expected_base = 0;
    for submesh in &buffers.submeshes {
        assert_eq!(submesh.base_index, expected_base);
        expected_base += submesh.index_count;

        let slice = &buffers.indices[submesh.index_range().start as usize
            ..submesh.index_range().end as usize];
        for &index in slice {
            assert!(
                ((submesh.base_vertex + index) as usize) < buffers.vertices.len(),
                "index {index} of {submesh:?} points past the vertex buffer"
            );
        }
    }
    assert_eq!(expected_base as usize, buffers.indices.len());
}

#[test]
fn meshes_follow_depth_first_node_order() {
    // root(m2) -> [a(m0) -> [c(m3)], b(m1)]
    let mut scene = SourceScene::default();
    for i in 0..4 {
        scene.add_mesh(fan_mesh(3, i));
    }
    let c = scene.add_node(SourceNode {
        name: "c".to_string(),
        meshes: vec![3],
        children: vec![],
    });
    let a = scene.add_node(SourceNode {
        name: "a".to_string(),
        meshes: vec![0],
        children: vec![c],
    });
    let b = scene.add_node(SourceNode {
        name: "b".to_string(),
        meshes: vec![1],
        children: vec![],
    });
    scene.root = scene.add_node(SourceNode {
        name: "root".to_string(),
        meshes: vec![2],
        children: vec![a, b],
    });

    let buffers = flatten_scene(&scene).expect("scene flattens");
    let order: Vec<u32> = buffers
        .submeshes
        .iter()
        .map(|sm| sm.material_index)
        .collect();
    assert_eq!(order, vec![2, 0, 3, 1]);
}

#[test]
fn a_mesh_referenced_twice_is_flattened_twice() {
    let mut scene = flat_scene(vec![fan_mesh(3, 0)]);
    scene.nodes[scene.root].meshes.push(0);

    let buffers = flatten_scene(&scene).expect("scene flattens");
    assert_eq!(buffers.submeshes.len(), 2);
    assert_eq!(buffers.submeshes[1].base_vertex, 3);
}

#[test]
fn missing_attributes_get_defaults() {
    let buffers = flatten_scene(&flat_scene(vec![fan_mesh(3, 0)])).expect("scene flattens");
    for vertex in &buffers.vertices {
        assert_eq!(vertex.normal, DEFAULT_NORMAL);
        assert_eq!(vertex.tex_coords, DEFAULT_TEX_COORDS);
    }
}

#[test]
fn declared_attributes_are_copied() {
    let mut mesh = fan_mesh(3, 0);
    mesh.normals = Some(vec![[0.0, 0.0, 1.0]; 3]);
    mesh.tex_coords = Some(vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
    let buffers = flatten_scene(&flat_scene(vec![mesh])).expect("scene flattens");

    assert_eq!(buffers.vertices[2].normal, [0.0, 0.0, 1.0]);
    assert_eq!(buffers.vertices[2].tex_coords, [0.5, 1.0]);
}

#[test]
fn scene_without_root_is_an_error() {
    let mut scene = flat_scene(vec![fan_mesh(3, 0)]);
    scene.root = 42;

    assert!(flatten_scene(&scene).is_err());
}

#[test]
fn scene_with_only_faceless_meshes_is_an_error() {
    let points = SourceMesh {
        name: "points".to_string(),
        positions: vec![[0.0; 3]; 4],
        ..Default::default()
    };

    let err = flatten_scene(&flat_scene(vec![points])).expect_err("nothing to draw");
    assert!(err.to_string().contains("no faces"));
}

#[test]
fn mesh_without_faces_still_gets_a_submesh() {
    let empty = SourceMesh {
        name: "points".to_string(),
        positions: vec![[0.0; 3]; 2],
        ..Default::default()
    };
    let buffers =
        flatten_scene(&flat_scene(vec![empty, fan_mesh(3, 1)])).expect("scene flattens");

    assert_eq!(buffers.submeshes.len(), 2);
    assert_eq!(buffers.submeshes[0].index_count, 0);
    assert_eq!(buffers.submeshes[1].base_vertex, 2);
    assert_eq!(buffers.submeshes[1].base_index, 0);
}
