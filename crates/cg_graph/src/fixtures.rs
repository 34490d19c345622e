//! A small training-pipeline object graph shared by the unit tests.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::time::Duration;

use crate::derive::Configurable;
use crate::impl_config_enum;
use crate::object::{Attr, BackRef, Configurable, Device, Environment, NumericArray, ToAttr};
use crate::path::TypePath;
use crate::registry::TypeRegistry;
use crate::value::{Mapping, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
}

impl_config_enum!(Activation {
    Relu => "relu",
    Tanh => "tanh",
});

#[derive(Configurable, Debug)]
pub struct Mlp {
    pub hidden_layers: Vec<u32>,
    #[config(default)]
    pub activation: Activation,
    #[config(default)]
    pub device: Device,
}

impl Mlp {
    pub fn new(hidden_layers: Vec<u32>) -> Self {
        Self {
            hidden_layers,
            activation: Activation::Relu,
            device: Device::Cpu,
        }
    }
}

#[derive(Configurable, Debug)]
#[config(optimizer)]
pub struct Adam {
    #[config(default)]
    pub params: Vec<f64>,
    pub lr: f64,
    #[config(defaults)]
    pub defaults: Mapping,
}

impl Adam {
    pub fn new(params: Vec<f64>, lr: f64) -> Self {
        let mut defaults = Mapping::default();
        defaults.insert("lr".into(), Value::Float(1e-3));
        defaults.insert("eps".into(), Value::Float(1e-8));
        defaults.insert("amsgrad".into(), Value::Bool(false));
        Self { params, lr, defaults }
    }
}

#[derive(Configurable, Debug)]
#[config(scheduler, auto_register)]
pub struct StepLr {
    pub optimizer: Rc<Adam>,
    pub step_size: u32,
    #[config(default)]
    pub gamma: f64,
}

#[derive(Debug, Default)]
pub struct CartPole;

impl TypePath for CartPole {
    fn type_path() -> &'static str {
        "cg_graph::fixtures::CartPole"
    }

    fn type_name() -> &'static str {
        "CartPole"
    }

    fn module_path() -> Option<&'static str> {
        Some("cg_graph::fixtures")
    }
}

impl Environment for CartPole {}

#[derive(Configurable, Debug)]
pub struct Agent {
    pub policy: Rc<Mlp>,
    pub target: Rc<Mlp>,
    pub optimizer: Rc<Adam>,
    pub scheduler: Option<Rc<StepLr>>,
    #[config(environment)]
    pub env: Rc<dyn Environment>,
    pub gamma: f64,
    pub obs_scale: NumericArray,
    #[config(skip)]
    pub steps: u64,
}

#[derive(Configurable, Debug)]
pub struct Leaf {
    pub y: i64,
}

#[derive(Configurable, Debug)]
pub struct Pair {
    pub x: i64,
    pub b: Rc<Leaf>,
}

#[derive(Configurable, Debug)]
pub struct Twin {
    pub b1: Rc<Leaf>,
    pub b2: Rc<Leaf>,
}

#[derive(Configurable, Debug)]
pub struct Trainer {
    pub callbacks: Vec<Rc<Callback>>,
}

#[derive(Configurable, Debug)]
pub struct Callback {
    pub owner: BackRef,
}

#[derive(Configurable, Debug)]
pub struct Link {
    pub next: Option<Rc<Link>>,
}

/// Holds values without a document form.
#[derive(Debug, Default)]
pub struct Clock {
    pub skip_started_at: bool,
}

impl TypePath for Clock {
    fn type_path() -> &'static str {
        "cg_graph::fixtures::Clock"
    }

    fn type_name() -> &'static str {
        "Clock"
    }
}

impl Configurable for Clock {
    fn parameters(&self) -> &'static [&'static str] {
        &["started_at", "laps"]
    }

    fn attribute(&self, name: &str) -> Option<Attr> {
        match name {
            "started_at" if self.skip_started_at => Some(Attr::Value(Value::Null)),
            "started_at" => Some(Attr::foreign::<Duration>()),
            "laps" => Some(Attr::Seq(vec![3i32.to_attr(), Attr::foreign::<Duration>()])),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Builders

pub fn agent() -> Rc<Agent> {
    let policy = Rc::new(Mlp {
        hidden_layers: vec![64, 64],
        activation: Activation::Tanh,
        device: Device::Cuda(Some(0)),
    });
    let optimizer = Rc::new(Adam::new(vec![0.1, 0.2], 3e-4));
    let scheduler = Rc::new(StepLr {
        optimizer: optimizer.clone(),
        step_size: 100,
        gamma: 0.5,
    });
    Rc::new(Agent {
        target: policy.clone(),
        policy,
        optimizer,
        scheduler: Some(scheduler),
        env: Rc::new(CartPole),
        gamma: 0.99,
        obs_scale: NumericArray::from_vec(vec![1.0, 0.5]),
        steps: 1000,
    })
}

/// A trainer whose callbacks point back at it.
pub fn trainer_with_callbacks(count: usize) -> Rc<Trainer> {
    let owner = BackRef::empty();
    let callbacks = (0..count)
        .map(|_| Rc::new(Callback { owner: owner.clone() }))
        .collect();
    let trainer = Rc::new(Trainer { callbacks });
    let target: Rc<dyn Configurable> = trainer.clone();
    owner.set(&target);
    trainer
}

pub fn chain(len: usize) -> Rc<Link> {
    let mut link = Rc::new(Link { next: None });
    for _ in 1..len {
        link = Rc::new(Link { next: Some(link) });
    }
    link
}

/// A registry with every constructible fixture.
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::empty();
    registry.register::<Mlp>();
    registry.register::<Adam>();
    registry.register::<StepLr>();
    registry.register::<Agent>();
    registry.register::<Leaf>();
    registry.register::<Pair>();
    registry.register::<Twin>();
    registry.register::<Trainer>();
    registry.register::<Callback>();
    registry.register::<Link>();
    registry.register_environment::<CartPole>();
    registry
}
