//! 展示用映射表（状态、等级、K8s 对象类型）。

use domain::AlertStatus;

/// 告警状态中文名；未知状态原样返回。
pub fn map_status(status: &AlertStatus) -> &str {
    match status {
        AlertStatus::Firing => "告警中",
        AlertStatus::Resolved => "已恢复",
        AlertStatus::Other(value) => value.as_str(),
    }
}

/// 告警等级中文名；未知等级统一为“一般”。
pub fn map_severity(severity: &str) -> &'static str {
    match severity {
        "Critical" => "紧急",
        "High" => "严重",
        "Warning" => "警告",
        "Low" => "轻微",
        _ => "一般",
    }
}

/// 对象类型中文名；未收录的类型原样返回。
pub fn map_object_kind(kind: &str) -> &str {
    match kind {
        "Cluster" => "集群",
        // 工作负载
        "Node" => "节点",
        "Pod" => "Pod",
        "Deployment" => "部署",
        "StatefulSet" => "有状态副本集",
        "DaemonSet" => "守护进程集",
        "ReplicaSet" => "副本集",
        "Job" => "任务",
        "CronJob" => "定时任务",
        // 服务发现
        "Service" => "服务",
        "Ingress" => "入口",
        "Endpoints" => "端点",
        // 配置与存储
        "ConfigMap" => "配置字典",
        "Secret" => "密钥",
        "PersistentVolume" => "持久卷",
        "PersistentVolumeClaim" => "持久卷声明",
        "StorageClass" => "存储类",
        // 命名空间与配额
        "Namespace" => "命名空间",
        "ResourceQuota" => "资源配额",
        "LimitRange" => "限制范围",
        // 访问控制
        "ServiceAccount" => "服务账号",
        "Role" => "角色",
        "ClusterRole" => "集群角色",
        "RoleBinding" => "角色绑定",
        "ClusterRoleBinding" => "集群角色绑定",
        "NetworkPolicy" => "网络策略",
        // 伸缩与中断预算
        "HorizontalPodAutoscaler" => "水平自动伸缩",
        "VerticalPodAutoscaler" => "垂直自动伸缩",
        "PodDisruptionBudget" => "Pod中断预算",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_passes_through() {
        assert_eq!(map_object_kind("Deployment"), "部署");
        assert_eq!(map_object_kind("KafkaTopic"), "KafkaTopic");
        assert_eq!(map_object_kind(""), "");
    }

    #[test]
    fn severity_defaults_to_normal() {
        assert_eq!(map_severity("Critical"), "紧急");
        assert_eq!(map_severity("critical"), "一般");
    }
}
